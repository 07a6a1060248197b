mod athlete;
mod category;
pub mod cpf;
mod training_center;

pub use athlete::{Athlete, NewAthlete};
pub use category::Category;
pub use cpf::{Cpf, InvalidCpf, format_cpf};
pub use training_center::TrainingCenter;
