mod integration;
mod ztp;
