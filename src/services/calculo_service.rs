// src/services/calculo_service.rs

//! Cálculo dos valores de uma fatura: desconto, assinatura e economia.
//!
//! Com template, as fórmulas cadastradas pela cooperativa mandam; se alguma
//! falhar, caímos no método padrão só para aquele campo e avisamos o usuário.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    models::fatura::{AvisoCalculo, BaseCalculo, CalculoResultado, CampoFormula, FormulasCalculo},
    services::formula::{avaliar_formula, verificar_estrutura, FormulaEvaluationError},
};

// Nomes das variáveis disponíveis para as fórmulas
pub const VAR_TOTAL_FATURA: &str = "total_fatura";
pub const VAR_ILUMINACAO_PUBLICA: &str = "iluminacao_publica";
pub const VAR_OUTROS_VALORES: &str = "outros_valores";
pub const VAR_FATURA_CONCESSIONARIA: &str = "fatura_concessionaria";
pub const VAR_PERCENTUAL_DESCONTO: &str = "percentual_desconto";
pub const VAR_VALOR_DESCONTO: &str = "valor_desconto";

impl BaseCalculo {
    pub fn variaveis(&self) -> HashMap<String, Decimal> {
        HashMap::from([
            (VAR_TOTAL_FATURA.to_string(), self.total_fatura),
            (VAR_ILUMINACAO_PUBLICA.to_string(), self.iluminacao_publica),
            (VAR_OUTROS_VALORES.to_string(), self.outros_valores),
            (VAR_FATURA_CONCESSIONARIA.to_string(), self.fatura_concessionaria),
            (VAR_PERCENTUAL_DESCONTO.to_string(), self.percentual_desconto),
        ])
    }
}

impl CampoFormula {
    fn descricao(&self) -> &'static str {
        match self {
            CampoFormula::ValorDesconto => "valor do desconto",
            CampoFormula::ValorAssinatura => "valor da assinatura",
        }
    }
}

fn aviso_metodo_padrao(campo: CampoFormula) -> AvisoCalculo {
    AvisoCalculo {
        campo,
        mensagem: format!(
            "Erro na fórmula de {}. Usando método padrão.",
            campo.descricao()
        ),
    }
}

// Saturamos em vez de entrar em pânico: o caminho padrão não pode falhar.
fn desconto_padrao(total: Decimal, luz: Decimal, outros: Decimal, pct: Decimal) -> Decimal {
    let base = total.saturating_sub(luz).saturating_sub(outros);
    base.saturating_mul(pct / Decimal::ONE_HUNDRED)
}

fn assinatura_padrao(total: Decimal, desconto: Decimal, concessionaria: Decimal) -> Decimal {
    total.saturating_sub(desconto).saturating_sub(concessionaria)
}

/// Cálculo fixo, sem template.
///
/// `valor_desconto = (total - luz - outros) * pct / 100`,
/// `valor_assinatura = total - valor_desconto - concessionaria`,
/// `economia = valor_desconto`.
pub fn calculo_padrao(
    total_fatura: Decimal,
    iluminacao_publica: Decimal,
    outros_valores: Decimal,
    fatura_concessionaria: Decimal,
    percentual_desconto: Decimal,
) -> CalculoResultado {
    let valor_desconto = desconto_padrao(
        total_fatura,
        iluminacao_publica,
        outros_valores,
        percentual_desconto,
    );
    let valor_assinatura = assinatura_padrao(total_fatura, valor_desconto, fatura_concessionaria);

    CalculoResultado {
        valor_desconto,
        valor_assinatura,
        economia: valor_desconto,
        avisos: Vec::new(),
    }
}

/// Aplica as fórmulas do template. Nunca falha: cada fórmula com erro é
/// trocada pelo método padrão e gera um aviso.
pub fn aplicar_formulas_template(base: &BaseCalculo, formulas: &FormulasCalculo) -> CalculoResultado {
    let mut avisos = Vec::new();
    let mut variaveis = base.variaveis();

    let valor_desconto = match avaliar_formula(&formulas.formula_valor_desconto, &variaveis) {
        Ok(valor) => valor,
        Err(e) => {
            tracing::warn!("⚠️ Fórmula de desconto falhou, usando método padrão: {}", e);
            avisos.push(aviso_metodo_padrao(CampoFormula::ValorDesconto));
            desconto_padrao(
                base.total_fatura,
                base.iluminacao_publica,
                base.outros_valores,
                base.percentual_desconto,
            )
        }
    };

    variaveis.insert(VAR_VALOR_DESCONTO.to_string(), valor_desconto);

    let valor_assinatura = match avaliar_formula(&formulas.formula_valor_assinatura, &variaveis) {
        Ok(valor) => valor,
        Err(e) => {
            tracing::warn!("⚠️ Fórmula de assinatura falhou, usando método padrão: {}", e);
            avisos.push(aviso_metodo_padrao(CampoFormula::ValorAssinatura));
            assinatura_padrao(base.total_fatura, valor_desconto, base.fatura_concessionaria)
        }
    };

    CalculoResultado {
        valor_desconto,
        valor_assinatura,
        economia: valor_desconto,
        avisos,
    }
}

/// Confere se as fórmulas de um template são válidas antes de gravá-lo.
///
/// Só erros de sintaxe e variáveis desconhecidas contam: divisão por zero e
/// estouro dependem dos valores de cada fatura. A checagem é estrutural, sem
/// calcular, para que nenhuma conta impossível esconda um erro mais adiante.
pub fn verificar_formulas(formulas: &FormulasCalculo) -> Result<(), (CampoFormula, FormulaEvaluationError)> {
    let mut variaveis: HashMap<String, Decimal> = BaseCalculo {
        total_fatura: Decimal::ONE,
        iluminacao_publica: Decimal::ONE,
        outros_valores: Decimal::ONE,
        fatura_concessionaria: Decimal::ONE,
        percentual_desconto: Decimal::ONE,
    }
    .variaveis();

    verificar_estrutura(&formulas.formula_valor_desconto, &variaveis)
        .map_err(|e| (CampoFormula::ValorDesconto, e))?;
    variaveis.insert(VAR_VALOR_DESCONTO.to_string(), Decimal::ONE);
    verificar_estrutura(&formulas.formula_valor_assinatura, &variaveis)
        .map_err(|e| (CampoFormula::ValorAssinatura, e))
}

/// Ponto de entrada usado pelas faturas e pela pré-visualização.
pub fn calcular(base: &BaseCalculo, template: Option<&FormulasCalculo>) -> CalculoResultado {
    match template {
        Some(formulas) => aplicar_formulas_template(base, formulas),
        None => calculo_padrao(
            base.total_fatura,
            base.iluminacao_publica,
            base.outros_valores,
            base.fatura_concessionaria,
            base.percentual_desconto,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::formula::FormulaErrorKind;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn base_exemplo() -> BaseCalculo {
        BaseCalculo {
            total_fatura: dec!(1000),
            iluminacao_publica: dec!(50),
            outros_valores: dec!(30),
            fatura_concessionaria: dec!(400),
            percentual_desconto: dec!(20),
        }
    }

    fn formulas(desconto: &str, assinatura: &str) -> FormulasCalculo {
        FormulasCalculo {
            formula_valor_desconto: desconto.to_string(),
            formula_valor_assinatura: assinatura.to_string(),
        }
    }

    fn padrao_de(base: &BaseCalculo) -> CalculoResultado {
        calculo_padrao(
            base.total_fatura,
            base.iluminacao_publica,
            base.outros_valores,
            base.fatura_concessionaria,
            base.percentual_desconto,
        )
    }

    #[test]
    fn default_calculation_matches_reference_example() {
        let r = calculo_padrao(dec!(1000), dec!(50), dec!(30), dec!(400), dec!(20));
        assert_eq!(r.valor_desconto, dec!(184));
        assert_eq!(r.valor_assinatura, dec!(416));
        assert_eq!(r.economia, dec!(184));
        assert!(r.avisos.is_empty());
    }

    #[test]
    fn template_formulas_drive_the_result() {
        let t = formulas(
            "(total_fatura - iluminacao_publica) * percentual_desconto / 100",
            "total_fatura - valor_desconto",
        );
        let r = aplicar_formulas_template(&base_exemplo(), &t);

        // (1000 - 50) * 20 / 100 = 190 ; 1000 - 190 = 810
        assert_eq!(r.valor_desconto, dec!(190));
        assert_eq!(r.valor_assinatura, dec!(810));
        assert_eq!(r.economia, dec!(190));
        assert!(r.avisos.is_empty());
    }

    #[test]
    fn template_may_diverge_from_default_invariant() {
        let t = formulas("100", "fatura_concessionaria * 2");
        let r = aplicar_formulas_template(&base_exemplo(), &t);
        assert_eq!(r.valor_desconto, dec!(100));
        assert_eq!(r.valor_assinatura, dec!(800));
    }

    #[test]
    fn invalid_template_falls_back_to_default_calculation() {
        let base = base_exemplo();
        let t = formulas("(total_fatura * 2", "valor_desconto +");
        let r = aplicar_formulas_template(&base, &t);
        let padrao = padrao_de(&base);

        assert_eq!(r.valor_desconto, padrao.valor_desconto);
        assert_eq!(r.valor_assinatura, padrao.valor_assinatura);
        assert_eq!(r.economia, padrao.economia);
        assert_eq!(r.avisos.len(), 2);
        assert_eq!(r.avisos[0].campo, CampoFormula::ValorDesconto);
        assert_eq!(r.avisos[1].campo, CampoFormula::ValorAssinatura);
        assert!(r.avisos[0].mensagem.contains("método padrão"));
    }

    #[test]
    fn subscription_fallback_uses_template_discount() {
        let t = formulas("total_fatura / 10", "total_fatura / 0");
        let r = aplicar_formulas_template(&base_exemplo(), &t);

        assert_eq!(r.valor_desconto, dec!(100));
        // 1000 - 100 - 400
        assert_eq!(r.valor_assinatura, dec!(500));
        assert_eq!(r.avisos.len(), 1);
        assert_eq!(r.avisos[0].campo, CampoFormula::ValorAssinatura);
    }

    #[test]
    fn discount_formula_cannot_see_valor_desconto() {
        let t = formulas("valor_desconto * 2", "total_fatura - valor_desconto");
        let r = aplicar_formulas_template(&base_exemplo(), &t);

        assert_eq!(r.valor_desconto, dec!(184));
        assert_eq!(r.valor_assinatura, dec!(816));
        assert_eq!(r.avisos.len(), 1);
    }

    #[test]
    fn template_check_rejects_only_structural_errors() {
        let ok = formulas("total_fatura / (outros_valores - 1)", "total_fatura - valor_desconto");
        assert!(verificar_formulas(&ok).is_ok());

        let sintaxe = formulas("total_fatura *", "total_fatura");
        let (campo, erro) = verificar_formulas(&sintaxe).unwrap_err();
        assert_eq!(campo, CampoFormula::ValorDesconto);
        assert!(matches!(erro.kind, FormulaErrorKind::Syntax(_)));

        let desconhecida = formulas("total_fatura", "total_fatura - tarifa_extra");
        let (campo, erro) = verificar_formulas(&desconhecida).unwrap_err();
        assert_eq!(campo, CampoFormula::ValorAssinatura);
        assert_eq!(erro.kind, FormulaErrorKind::UnknownVariable("tarifa_extra".into()));

        // Erro depois de uma divisão que zera com todas as variáveis em 1
        let parenteses = formulas("total_fatura / (outros_valores - 1) )", "total_fatura");
        let (campo, erro) = verificar_formulas(&parenteses).unwrap_err();
        assert_eq!(campo, CampoFormula::ValorDesconto);
        assert!(matches!(erro.kind, FormulaErrorKind::Syntax(_)));

        let depois_da_divisao = formulas(
            "total_fatura",
            "total_fatura / (valor_desconto - 1) + taxa_inexistente",
        );
        let (campo, erro) = verificar_formulas(&depois_da_divisao).unwrap_err();
        assert_eq!(campo, CampoFormula::ValorAssinatura);
        assert_eq!(erro.kind, FormulaErrorKind::UnknownVariable("taxa_inexistente".into()));

        assert!(verificar_formulas(&formulas("1/0 +", "total_fatura")).is_err());
        assert!(verificar_formulas(&formulas("1/0", "total_fatura")).is_ok());
    }

    #[test]
    fn calcular_without_template_is_the_default() {
        let base = base_exemplo();
        assert_eq!(calcular(&base, None), padrao_de(&base));
    }

    fn dinheiro() -> impl Strategy<Value = Decimal> {
        (0i64..100_000_000).prop_map(|centavos| Decimal::new(centavos, 2))
    }

    fn base_valida() -> impl Strategy<Value = BaseCalculo> {
        (dinheiro(), dinheiro(), dinheiro(), dinheiro(), 0i64..=10_000).prop_map(
            |(a, b, c, concessionaria, pct)| {
                // total >= luz + outros
                let (luz, outros) = (b.min(a), c.min(a - b.min(a)));
                BaseCalculo {
                    total_fatura: a,
                    iluminacao_publica: luz,
                    outros_valores: outros,
                    fatura_concessionaria: concessionaria,
                    percentual_desconto: Decimal::new(pct, 2),
                }
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// O método padrão segue exatamente as duas fórmulas fixas.
        #[test]
        fn default_path_round_trip(base in base_valida()) {
            let r = padrao_de(&base);
            let esperado_desconto = (base.total_fatura - base.iluminacao_publica - base.outros_valores)
                * (base.percentual_desconto / Decimal::ONE_HUNDRED);

            prop_assert_eq!(r.valor_desconto, esperado_desconto);
            prop_assert_eq!(
                r.valor_assinatura,
                base.total_fatura - r.valor_desconto - base.fatura_concessionaria
            );
        }

        /// Economia é sempre igual ao desconto, com ou sem template.
        #[test]
        fn economia_equals_discount_on_every_path(
            base in base_valida(),
            desconto in prop::sample::select(vec![
                "total_fatura * percentual_desconto / 100",
                "(total_fatura - outros_valores",
                "iluminacao_publica + 1",
                "total_fatura / 0",
            ]),
        ) {
            let t = formulas(desconto, "total_fatura - valor_desconto");
            let com_template = aplicar_formulas_template(&base, &t);
            prop_assert_eq!(com_template.economia, com_template.valor_desconto);

            let padrao = padrao_de(&base);
            prop_assert_eq!(padrao.economia, padrao.valor_desconto);
        }

        /// Sem estado escondido: mesma entrada, mesma saída.
        #[test]
        fn template_application_is_idempotent(base in base_valida()) {
            let t = formulas(
                "(total_fatura - iluminacao_publica - outros_valores) * percentual_desconto / 100",
                "total_fatura - valor_desconto - fatura_concessionaria",
            );
            prop_assert_eq!(
                aplicar_formulas_template(&base, &t),
                aplicar_formulas_template(&base, &t)
            );
        }

        /// Template equivalente ao padrão produz o mesmo resultado.
        #[test]
        fn default_equivalent_template_matches_default(base in base_valida()) {
            let t = formulas(
                "(total_fatura - iluminacao_publica - outros_valores) * (percentual_desconto / 100)",
                "total_fatura - valor_desconto - fatura_concessionaria",
            );
            let r = aplicar_formulas_template(&base, &t);
            let padrao = padrao_de(&base);
            prop_assert_eq!(r.valor_desconto, padrao.valor_desconto);
            prop_assert_eq!(r.valor_assinatura, padrao.valor_assinatura);
            prop_assert!(r.avisos.is_empty());
        }
    }
}
