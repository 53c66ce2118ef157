pub mod euler_maruyama;
