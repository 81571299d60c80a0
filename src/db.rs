pub mod cooperado_repo;
pub use cooperado_repo::CooperadoRepository;
pub mod usina_repo;
pub use usina_repo::UsinaRepository;
pub mod fatura_repo;
pub use fatura_repo::FaturaRepository;
pub mod pagamento_repo;
pub use pagamento_repo::PagamentoRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
