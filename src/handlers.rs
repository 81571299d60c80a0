pub mod cooperados;
pub mod usinas;
pub mod calculo;
pub mod faturas;
pub mod pagamentos;
pub mod finance;
pub mod settings;
pub mod documents;

use rust_decimal::Decimal;
use validator::ValidationError;

// ---
// Validações compartilhadas pelos payloads
// ---
pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_percentual(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("O percentual deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percent_must_be_between_zero_and_hundred() {
        assert!(validate_percentual(&dec!(0)).is_ok());
        assert!(validate_percentual(&dec!(100)).is_ok());
        assert!(validate_percentual(&dec!(100.01)).is_err());
        assert!(validate_percentual(&dec!(-1)).is_err());
        assert!(validate_not_negative(&dec!(-0.01)).is_err());
    }
}
