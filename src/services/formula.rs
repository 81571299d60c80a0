// src/services/formula.rs

//! Avaliador das fórmulas de cálculo de fatura.
//!
//! As fórmulas são texto livre cadastrado pela cooperativa, por exemplo
//! `"(total_fatura - iluminacao_publica) * percentual_desconto / 100"`.
//! Aceitamos apenas números, variáveis conhecidas, `+ - * /` e parênteses.
//! Nada aqui executa código arbitrário.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Limite de aninhamento de parênteses/sinais (evita estouro de pilha).
const MAX_PROFUNDIDADE: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaErrorKind {
    #[error("erro de sintaxe: {0}")]
    Syntax(String),

    #[error("variável desconhecida '{0}'")]
    UnknownVariable(String),

    #[error("divisão por zero")]
    DivisionByZero,

    #[error("resultado fora do intervalo numérico")]
    Overflow,
}

/// Falha ao avaliar uma fórmula. Guarda o texto original e a versão com as
/// variáveis já substituídas, para diagnóstico.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Erro ao avaliar fórmula '{formula}' (substituída: '{substituida}'): {kind}")]
pub struct FormulaEvaluationError {
    pub formula: String,
    pub substituida: String,
    pub kind: FormulaErrorKind,
}

// --- Tokens ---

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Numero(Decimal),
    Variavel(String),
    Mais,
    Menos,
    Vezes,
    Dividir,
    AbreParen,
    FechaParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Numero(n) => write!(f, "{}", n),
            Token::Variavel(nome) => f.write_str(nome),
            Token::Mais => f.write_str("+"),
            Token::Menos => f.write_str("-"),
            Token::Vezes => f.write_str("*"),
            Token::Dividir => f.write_str("/"),
            Token::AbreParen => f.write_str("("),
            Token::FechaParen => f.write_str(")"),
        }
    }
}

fn inicio_de_identificador(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn parte_de_identificador(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `Avaliar` calcula o valor; `SoEstrutura` confere gramática e nomes de
/// variáveis sem fazer conta nenhuma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modo {
    Avaliar,
    SoEstrutura,
}

fn tokenizar(formula: &str, modo: Modo) -> Result<Vec<Token>, FormulaErrorKind> {
    let mut tokens = Vec::new();
    let mut chars = formula.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let mut literal = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    literal.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let numero = match parse_numero(&literal) {
                Err(FormulaErrorKind::Overflow) if modo == Modo::SoEstrutura => Decimal::ZERO,
                resultado => resultado?,
            };
            tokens.push(Token::Numero(numero));
            continue;
        }

        if inicio_de_identificador(c) {
            let mut nome = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if parte_de_identificador(d) {
                    nome.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Variavel(nome));
            continue;
        }

        let token = match c {
            '+' => Token::Mais,
            '-' => Token::Menos,
            '*' => Token::Vezes,
            '/' => Token::Dividir,
            '(' => Token::AbreParen,
            ')' => Token::FechaParen,
            outro => {
                return Err(FormulaErrorKind::Syntax(format!(
                    "caractere inesperado '{}' na posição {}",
                    outro, pos
                )));
            }
        };
        tokens.push(token);
        chars.next();
    }

    Ok(tokens)
}

fn parse_numero(literal: &str) -> Result<Decimal, FormulaErrorKind> {
    let invalido = || FormulaErrorKind::Syntax(format!("número inválido '{}'", literal));

    if literal.matches('.').count() > 1 || literal.ends_with('.') {
        return Err(invalido());
    }

    // ".5" -> "0.5"
    let normalizado = if literal.starts_with('.') {
        format!("0{}", literal)
    } else {
        literal.to_string()
    };

    // Formato já conferido acima: se ainda falhar, são dígitos demais.
    Decimal::from_str(&normalizado).map_err(|_| FormulaErrorKind::Overflow)
}

// --- Parser (descida recursiva, avalia enquanto lê) ---

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    profundidade: usize,
    valores: &'a HashMap<String, Decimal>,
    modo: Modo,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], valores: &'a HashMap<String, Decimal>, modo: Modo) -> Self {
        Self { tokens, pos: 0, profundidade: 0, valores, modo }
    }

    fn operar(
        &self,
        op: fn(Decimal, Decimal) -> Option<Decimal>,
        lhs: Decimal,
        rhs: Decimal,
    ) -> Result<Decimal, FormulaErrorKind> {
        match self.modo {
            Modo::SoEstrutura => Ok(Decimal::ZERO),
            Modo::Avaliar => op(lhs, rhs).ok_or(FormulaErrorKind::Overflow),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn avaliar(mut self) -> Result<Decimal, FormulaErrorKind> {
        if self.tokens.is_empty() {
            return Err(FormulaErrorKind::Syntax("fórmula vazia".to_string()));
        }

        let valor = self.expressao()?;

        match self.peek() {
            None => Ok(valor),
            Some(Token::FechaParen) => Err(FormulaErrorKind::Syntax(
                "parênteses desbalanceados: ')' sem '(' correspondente".to_string(),
            )),
            Some(token) => Err(FormulaErrorKind::Syntax(format!(
                "token inesperado '{}'",
                token
            ))),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expressao(&mut self) -> Result<Decimal, FormulaErrorKind> {
        let mut acc = self.termo()?;
        loop {
            match self.peek() {
                Some(Token::Mais) => {
                    self.next();
                    let rhs = self.termo()?;
                    acc = self.operar(Decimal::checked_add, acc, rhs)?;
                }
                Some(Token::Menos) => {
                    self.next();
                    let rhs = self.termo()?;
                    acc = self.operar(Decimal::checked_sub, acc, rhs)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    // term := unary (('*' | '/') unary)*
    fn termo(&mut self) -> Result<Decimal, FormulaErrorKind> {
        let mut acc = self.unario()?;
        loop {
            match self.peek() {
                Some(Token::Vezes) => {
                    self.next();
                    let rhs = self.unario()?;
                    acc = self.operar(Decimal::checked_mul, acc, rhs)?;
                }
                Some(Token::Dividir) => {
                    self.next();
                    let rhs = self.unario()?;
                    if self.modo == Modo::Avaliar && rhs.is_zero() {
                        return Err(FormulaErrorKind::DivisionByZero);
                    }
                    acc = self.operar(Decimal::checked_div, acc, rhs)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    // unary := ('+' | '-') unary | primary
    fn unario(&mut self) -> Result<Decimal, FormulaErrorKind> {
        match self.peek() {
            Some(Token::Menos) => {
                self.next();
                let valor = self.aninhado(Self::unario)?;
                Ok(-valor)
            }
            Some(Token::Mais) => {
                self.next();
                self.aninhado(Self::unario)
            }
            _ => self.primario(),
        }
    }

    // primary := NUMBER | IDENT | '(' expr ')'
    fn primario(&mut self) -> Result<Decimal, FormulaErrorKind> {
        match self.next() {
            Some(Token::Numero(n)) => Ok(*n),
            Some(Token::Variavel(nome)) => self
                .valores
                .get(nome)
                .copied()
                .ok_or_else(|| FormulaErrorKind::UnknownVariable(nome.clone())),
            Some(Token::AbreParen) => {
                let valor = self.aninhado(Self::expressao)?;
                match self.next() {
                    Some(Token::FechaParen) => Ok(valor),
                    _ => Err(FormulaErrorKind::Syntax(
                        "parênteses desbalanceados: falta ')'".to_string(),
                    )),
                }
            }
            Some(token) => Err(FormulaErrorKind::Syntax(format!(
                "token inesperado '{}'",
                token
            ))),
            None => Err(FormulaErrorKind::Syntax(
                "fim inesperado da fórmula".to_string(),
            )),
        }
    }

    fn aninhado(
        &mut self,
        regra: fn(&mut Self) -> Result<Decimal, FormulaErrorKind>,
    ) -> Result<Decimal, FormulaErrorKind> {
        self.profundidade += 1;
        if self.profundidade > MAX_PROFUNDIDADE {
            return Err(FormulaErrorKind::Syntax(
                "fórmula aninhada demais".to_string(),
            ));
        }
        let resultado = regra(self);
        self.profundidade -= 1;
        resultado
    }
}

// --- API pública ---

/// Troca cada variável conhecida pelo seu valor, token a token.
///
/// Um nome só é substituído quando forma um identificador inteiro, então
/// `valor` não altera `valor_desconto`. Nomes desconhecidos ficam como estão.
pub fn substituir_variaveis(formula: &str, valores: &HashMap<String, Decimal>) -> String {
    let mut saida = String::with_capacity(formula.len());
    let mut chars = formula.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() || c == '.' {
            // Dígitos colados a letras ("2x") continuam parte do número aqui.
            saida.push(c);
            while let Some(&d) = chars.peek() {
                if parte_de_identificador(d) || d == '.' {
                    saida.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
        } else if inicio_de_identificador(c) {
            let mut nome = String::from(c);
            while let Some(&d) = chars.peek() {
                if parte_de_identificador(d) {
                    nome.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            match valores.get(&nome) {
                Some(valor) => saida.push_str(&valor.to_string()),
                None => saida.push_str(&nome),
            }
        } else {
            saida.push(c);
        }
    }

    saida
}

/// Avalia `formula` com as variáveis de `valores`.
///
/// Qualquer falha (sintaxe, variável desconhecida, divisão por zero,
/// estouro) vira `FormulaEvaluationError`; nunca devolvemos zero no lugar.
pub fn avaliar_formula(
    formula: &str,
    valores: &HashMap<String, Decimal>,
) -> Result<Decimal, FormulaEvaluationError> {
    let substituida = substituir_variaveis(formula, valores);
    tracing::debug!(formula, substituida = %substituida, "Avaliando fórmula");

    let resultado = tokenizar(formula, Modo::Avaliar)
        .and_then(|tokens| Parser::new(&tokens, valores, Modo::Avaliar).avaliar())
        .map_err(|kind| FormulaEvaluationError {
            formula: formula.to_string(),
            substituida: substituida.clone(),
            kind,
        })?;

    tracing::debug!(resultado = %resultado, "Resultado da fórmula");
    Ok(resultado)
}

/// Confere a fórmula inteira sem calcular: sintaxe e nomes de variáveis.
///
/// Só as chaves de `variaveis` importam. Divisão por zero e estouro dependem
/// dos valores e nunca aparecem aqui, então um erro no fim da fórmula não
/// fica escondido atrás de uma conta que falharia antes.
pub fn verificar_estrutura(
    formula: &str,
    variaveis: &HashMap<String, Decimal>,
) -> Result<(), FormulaEvaluationError> {
    tokenizar(formula, Modo::SoEstrutura)
        .and_then(|tokens| Parser::new(&tokens, variaveis, Modo::SoEstrutura).avaliar())
        .map(|_| ())
        .map_err(|kind| FormulaEvaluationError {
            formula: formula.to_string(),
            substituida: substituir_variaveis(formula, variaveis),
            kind,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valores(pares: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
        pares.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn base() -> HashMap<String, Decimal> {
        valores(&[
            ("total_fatura", dec!(1000)),
            ("iluminacao_publica", dec!(50)),
            ("outros_valores", dec!(30)),
            ("fatura_concessionaria", dec!(400)),
            ("percentual_desconto", dec!(20)),
        ])
    }

    #[test]
    fn evaluates_linear_formula_with_variables() {
        let resultado = avaliar_formula(
            "(total_fatura - iluminacao_publica - outros_valores) * percentual_desconto / 100",
            &base(),
        )
        .unwrap();
        assert_eq!(resultado, dec!(184));
    }

    #[test]
    fn respects_operator_precedence_and_parentheses() {
        let vazio = HashMap::new();
        assert_eq!(avaliar_formula("2 + 3 * 4", &vazio).unwrap(), dec!(14));
        assert_eq!(avaliar_formula("(2 + 3) * 4", &vazio).unwrap(), dec!(20));
        assert_eq!(avaliar_formula("10 - 4 - 3", &vazio).unwrap(), dec!(3));
        assert_eq!(avaliar_formula("100 / 4 / 5", &vazio).unwrap(), dec!(5));
    }

    #[test]
    fn handles_unary_signs_and_decimal_literals() {
        let vazio = HashMap::new();
        assert_eq!(avaliar_formula("-(2 + 3)", &vazio).unwrap(), dec!(-5));
        assert_eq!(avaliar_formula("3 - -2", &vazio).unwrap(), dec!(5));
        assert_eq!(avaliar_formula("+7", &vazio).unwrap(), dec!(7));
        assert_eq!(avaliar_formula(".5 * 4", &vazio).unwrap(), dec!(2));
        assert_eq!(avaliar_formula("12.25 + 0.75", &vazio).unwrap(), dec!(13));
    }

    #[test]
    fn negative_variable_values_are_substituted_safely() {
        let v = valores(&[("a", dec!(-5)), ("b", dec!(3))]);
        assert_eq!(avaliar_formula("b * a", &v).unwrap(), dec!(-15));
        assert_eq!(avaliar_formula("b - a", &v).unwrap(), dec!(8));
    }

    #[test]
    fn prefix_variable_names_do_not_collide() {
        let v = valores(&[("valor", dec!(10)), ("valor_desconto", dec!(3))]);

        let resultado = avaliar_formula("valor_desconto * 2 + valor", &v).unwrap();
        assert_eq!(resultado, dec!(16));

        assert_eq!(
            substituir_variaveis("valor_desconto * 2 + valor", &v),
            "3 * 2 + 10"
        );
    }

    #[test]
    fn unbalanced_parentheses_are_syntax_errors() {
        let err = avaliar_formula("(total_fatura - 10", &base()).unwrap_err();
        assert!(matches!(err.kind, FormulaErrorKind::Syntax(_)));
        assert_eq!(err.formula, "(total_fatura - 10");
        assert_eq!(err.substituida, "(1000 - 10");

        let err = avaliar_formula("total_fatura - 10)", &base()).unwrap_err();
        assert!(matches!(err.kind, FormulaErrorKind::Syntax(_)));
    }

    #[test]
    fn rejects_malformed_expressions() {
        let vazio = HashMap::new();
        for formula in ["", "   ", "2 +", "* 3", "2 3", "1..2", "5.", "2 ^ 3", "()"] {
            let err = avaliar_formula(formula, &vazio).unwrap_err();
            assert!(
                matches!(err.kind, FormulaErrorKind::Syntax(_)),
                "esperado erro de sintaxe para {:?}, veio {:?}",
                formula,
                err.kind
            );
        }
    }

    #[test]
    fn code_like_input_is_rejected() {
        let err = avaliar_formula("process.exit(1)", &base()).unwrap_err();
        assert!(matches!(
            err.kind,
            FormulaErrorKind::Syntax(_) | FormulaErrorKind::UnknownVariable(_)
        ));
    }

    #[test]
    fn unknown_variables_are_reported_by_name() {
        let err = avaliar_formula("total_fatura * taxa_extra", &base()).unwrap_err();
        assert_eq!(
            err.kind,
            FormulaErrorKind::UnknownVariable("taxa_extra".to_string())
        );
        assert_eq!(err.substituida, "1000 * taxa_extra");
    }

    #[test]
    fn oversized_literal_is_an_overflow() {
        let literal = "9".repeat(32);
        let err = avaliar_formula(&literal, &HashMap::new()).unwrap_err();
        assert_eq!(err.kind, FormulaErrorKind::Overflow);

        let err = avaliar_formula(&format!("1 + {}", literal), &HashMap::new()).unwrap_err();
        assert_eq!(err.kind, FormulaErrorKind::Overflow);
    }

    #[test]
    fn structure_check_sees_past_value_failures() {
        let v = valores(&[("total_fatura", dec!(1)), ("outros_valores", dec!(1))]);

        assert!(verificar_estrutura("total_fatura / (outros_valores - 1)", &v).is_ok());
        assert!(verificar_estrutura("1 / 0", &v).is_ok());
        assert!(verificar_estrutura(&"9".repeat(32), &v).is_ok());

        let err = verificar_estrutura("total_fatura / (outros_valores - 1) )", &v).unwrap_err();
        assert!(matches!(err.kind, FormulaErrorKind::Syntax(_)));

        let err = verificar_estrutura("1/0 +", &v).unwrap_err();
        assert!(matches!(err.kind, FormulaErrorKind::Syntax(_)));

        let err = verificar_estrutura(
            "total_fatura / (outros_valores - 1) + taxa_inexistente",
            &v,
        )
        .unwrap_err();
        assert_eq!(
            err.kind,
            FormulaErrorKind::UnknownVariable("taxa_inexistente".to_string())
        );
        assert_eq!(err.substituida, "1 / (1 - 1) + taxa_inexistente");
    }

    #[test]
    fn division_by_zero_is_an_error_not_zero() {
        let v = valores(&[("x", dec!(0))]);
        let err = avaliar_formula("10 / x", &v).unwrap_err();
        assert_eq!(err.kind, FormulaErrorKind::DivisionByZero);
    }

    #[test]
    fn overflow_is_reported() {
        let v = valores(&[("grande", Decimal::MAX)]);
        let err = avaliar_formula("grande * 10", &v).unwrap_err();
        assert_eq!(err.kind, FormulaErrorKind::Overflow);
    }

    #[test]
    fn deeply_nested_formula_is_rejected() {
        let formula = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        let err = avaliar_formula(&formula, &HashMap::new()).unwrap_err();
        assert!(matches!(err.kind, FormulaErrorKind::Syntax(_)));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let formula = "total_fatura - fatura_concessionaria * percentual_desconto / 100";
        let primeira = avaliar_formula(formula, &base()).unwrap();
        let segunda = avaliar_formula(formula, &base()).unwrap();
        assert_eq!(primeira, segunda);
    }
}
