mod tests;
mod properties;
mod parsing;
