pub mod association;
pub mod couleur;
pub mod element_superposable;
pub mod modele;
pub mod motif;
pub mod variante;
