pub(crate) mod bus;

pub(crate) mod calculator;

pub(crate) mod instrument;

pub(crate) mod logging;
