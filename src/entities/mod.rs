pub mod campaign;
pub mod investor;
pub mod matches;

pub use campaign::Entity as Campaign;
pub use investor::Entity as Investor;
pub use matches::Entity as Matches;
