mod policies;
mod tests;
