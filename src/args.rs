use std::path::PathBuf;

use clap::Parser;

/// Servicio de análisis de conducción a partir de imágenes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Fichero de configuración YAML (si no existe se usan los valores por defecto)
    #[arg(long, default_value = "config.yaml", value_name = "FILE")]
    pub config: PathBuf,

    /// Dirección de escucha, sustituye a `server.bind`
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}
