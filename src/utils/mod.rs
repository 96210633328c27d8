mod print_error_chain;

pub use print_error_chain::PrintErrorChain;
