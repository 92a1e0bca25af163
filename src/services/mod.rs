pub mod datamodel_service;

pub use datamodel_service::DatamodelService;
