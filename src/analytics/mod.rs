pub mod sde_density;
