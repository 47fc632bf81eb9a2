use serde::Serialize;

use crate::api::cpf_dto::CpfNetDto;
use crate::api::pnml_dto::PnmlNetDto;
use crate::api::xpdl_dto::XpdlPackageDto;
use crate::api::yawl_dto::YawlSpecificationDto;
use crate::config::CanoniserConfig;
use crate::domain::adapter::{
    Canonised, FormatAdapter, Notation, PnmlAdapter, Translated, XpdlAdapter, YawlAdapter, canonise, decanonise,
};
use crate::domain::cpf::Net;
use crate::error::Result;
use crate::loader::parser::{parse_json_file, to_json_string};

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Loads a notation document from a JSON file and canonises it.
pub fn canonise_file(notation: Notation, file_path: &str, config: &CanoniserConfig) -> Result<Canonised> {
    log::info!("Loading {} document from '{}'", notation, file_path);

    match notation {
        Notation::Yawl => canonise(&YawlAdapter::new(), &parse_json_file::<YawlSpecificationDto>(file_path)?, config),
        Notation::Xpdl => canonise(&XpdlAdapter::new(), &parse_json_file::<XpdlPackageDto>(file_path)?, config),
        Notation::Pnml => canonise(&PnmlAdapter::new(), &parse_json_file::<PnmlNetDto>(file_path)?, config),
    }
}

/// Renders a net in `notation` and serializes the document as JSON.
pub fn decanonise_to_json(notation: Notation, net: &Net, config: &CanoniserConfig) -> Result<Translated<String>> {
    match notation {
        Notation::Yawl => render_json(&YawlAdapter::new(), net, config),
        Notation::Xpdl => render_json(&XpdlAdapter::new(), net, config),
        Notation::Pnml => render_json(&PnmlAdapter::new(), net, config),
    }
}

/// Loads a canonical net from its JSON carrier. Nothing is validated here.
pub fn load_cpf_file(file_path: &str) -> Result<Net> {
    let dto: CpfNetDto = parse_json_file(file_path)?;
    Net::try_from(dto)
}

pub fn cpf_to_json(net: &Net) -> Result<String> {
    to_json_string(&CpfNetDto::from(net))
}

fn render_json<A>(adapter: &A, net: &Net, config: &CanoniserConfig) -> Result<Translated<String>>
where
    A: FormatAdapter,
    A::Document: Serialize,
{
    let Translated { output, warnings } = decanonise(adapter, net, config)?;
    Ok(Translated::new(to_json_string(&output)?, warnings))
}
