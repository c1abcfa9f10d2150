pub mod imgflip;
