use super::bonds::many_body::AxilrodTeller;
use super::bonds::mayer::{HardSphereBond, MayerBond};
use super::bonds::potentials::{LennardJones, SquareWell};
use super::bonds::{BondSource, ManyBodyBond};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PairParams {
    HardSphere {
        sigma: f64,
    },
    LennardJones {
        sigma: f64,
        epsilon: f64,
    },
    SquareWell {
        sigma: f64,
        lambda: f64,
        epsilon: f64,
    },
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ThreeBodyParams {
    pub nu: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PotentialParams {
    pub pair: PairParams,
    #[serde(default)]
    pub three_body: Option<ThreeBodyParams>,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

impl PotentialParams {
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    /// The pairwise Mayer bond described by these parameters.
    pub fn pair_bond(&self) -> BondSource {
        match self.pair {
            PairParams::HardSphere { sigma } => BondSource::radial(HardSphereBond::new(sigma)),
            PairParams::LennardJones { sigma, epsilon } => {
                BondSource::radial(MayerBond::new(LennardJones { sigma, epsilon }))
            }
            PairParams::SquareWell {
                sigma,
                lambda,
                epsilon,
            } => BondSource::radial(MayerBond::new(SquareWell {
                sigma,
                lambda,
                epsilon,
            })),
        }
    }

    pub fn many_body(&self) -> Option<Box<dyn ManyBodyBond>> {
        self.three_body
            .as_ref()
            .map(|p| Box::new(AxilrodTeller::new(p.nu)) as Box<dyn ManyBodyBond>)
    }
}
