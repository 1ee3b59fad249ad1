pub mod richter;
