//! Interface layer. The portal is served over HTTP only.

pub mod rest;
