//! State carrier: the byte form a domain packs its states into.

pub mod packed;
