pub mod formula;
pub mod calculo_service;
pub mod fatura_service;
pub mod pagamento_service;
pub mod finance_service;
pub mod document_service;
