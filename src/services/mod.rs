pub mod modeles;
pub mod motifs;

pub use modeles::ModeleService;
pub use motifs::MotifService;
