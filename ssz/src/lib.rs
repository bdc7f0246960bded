pub use ethereum_types::H256;

pub use crate::{
    error::Error,
    hc::Hc,
    persistent_list::PersistentList,
    porcelain::{merkleize, mix_in_length, SszHash},
};

mod error;
mod hc;
mod persistent_list;
mod porcelain;
