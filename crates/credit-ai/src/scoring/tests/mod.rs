mod common;

mod features;
