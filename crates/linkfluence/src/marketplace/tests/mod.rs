mod applications;
mod common;
mod routing;
