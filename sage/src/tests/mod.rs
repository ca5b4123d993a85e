

// Solver tests
mod backward_chaining;
