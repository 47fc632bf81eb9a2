pub mod cpf_dto;
pub mod pnml_dto;
pub mod xpdl_dto;
pub mod yawl_dto;
