pub mod user_repo;
pub use user_repo::UserRepository;
pub mod associate_repo;
pub use associate_repo::AssociateRepository;
pub mod layout_repo;
pub use layout_repo::LayoutRepository;
