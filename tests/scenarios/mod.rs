mod failure_handling;
mod wiring_validation;
mod yaml_pipelines;
