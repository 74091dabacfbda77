mod aggregation;
mod common;
mod matching;
