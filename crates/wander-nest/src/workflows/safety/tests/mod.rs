mod common;
mod escalation;
