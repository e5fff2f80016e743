pub mod titck;
