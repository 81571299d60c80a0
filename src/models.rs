pub mod auth;
pub mod cooperado;
pub mod fatura;
pub mod finance;
pub mod pagamento;
pub mod settings;
pub mod usina;
