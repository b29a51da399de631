pub mod bin_array;
pub mod lb_pair;
pub mod swap;
