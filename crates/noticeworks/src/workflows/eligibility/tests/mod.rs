mod common;

mod gate;
