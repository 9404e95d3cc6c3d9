mod client;

pub use client::AgendaClient;
