pub mod prioritize;
