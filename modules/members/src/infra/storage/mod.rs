pub mod entity;
pub mod filter;
pub mod migrations;
pub mod sea_orm_repo;

pub use sea_orm_repo::SeaOrmMembersRepository;
