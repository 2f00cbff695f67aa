mod common;

mod routing;
