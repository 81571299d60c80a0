// src/common/format.rs

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

/// Formata em reais: `1234.5` -> `"R$ 1.234,50"`.
pub fn format_brl(valor: Decimal) -> String {
    let arredondado = valor.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let texto = format!("{:.2}", arredondado.abs());
    let (inteiro, centavos) = texto.split_once('.').unwrap_or((texto.as_str(), "00"));

    let mut agrupado = String::with_capacity(inteiro.len() + inteiro.len() / 3);
    for (i, c) in inteiro.chars().enumerate() {
        if i > 0 && (inteiro.len() - i) % 3 == 0 {
            agrupado.push('.');
        }
        agrupado.push(c);
    }

    let sinal = if arredondado.is_sign_negative() && !arredondado.is_zero() { "-" } else { "" };
    format!("{}R$ {},{}", sinal, agrupado, centavos)
}

/// `2026-09-01` -> `"09/2026"`
pub fn format_mes_referencia(mes: NaiveDate) -> String {
    format!("{:02}/{}", mes.month(), mes.year())
}

/// Normaliza qualquer data para o primeiro dia do mês.
pub fn primeiro_dia_do_mes(data: NaiveDate) -> NaiveDate {
    data.with_day(1).unwrap_or(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn formats_brazilian_currency() {
        assert_eq!(format_brl(dec!(0)), "R$ 0,00");
        assert_eq!(format_brl(dec!(5.5)), "R$ 5,50");
        assert_eq!(format_brl(dec!(184)), "R$ 184,00");
        assert_eq!(format_brl(dec!(1234.567)), "R$ 1.234,57");
        assert_eq!(format_brl(dec!(1000000)), "R$ 1.000.000,00");
        assert_eq!(format_brl(dec!(-416.1)), "-R$ 416,10");
    }

    #[test]
    fn formats_reference_month() {
        let mes = NaiveDate::from_ymd_opt(2026, 9, 17).unwrap();
        assert_eq!(format_mes_referencia(mes), "09/2026");
        assert_eq!(
            primeiro_dia_do_mes(mes),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
        );
    }
}
