mod common;
mod flags;
mod recalculation;
mod scoring;
