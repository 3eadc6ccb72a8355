pub mod model;
pub mod optimisation;
pub mod problem;
pub mod solution;
pub mod solver;
pub mod stored_energy;
