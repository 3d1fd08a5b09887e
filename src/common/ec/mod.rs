mod encoder;
mod galois;

pub(crate) use encoder::ecc_per_block;
