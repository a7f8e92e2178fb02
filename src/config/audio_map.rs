//! config/audio_map.rs
//! Mapa de nombre del oshi -> URL pública del audio que reproduce Twilio.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct AudioCatalog {
    map: HashMap<String, String>,
}

impl Default for AudioCatalog {
    fn default() -> Self {
        // Valores originales del proyecto; se pueden sobreescribir con
        // el archivo JSON (AUDIO_MAP_FILE).
        let mut map = HashMap::new();
        map.insert(
            "早瀬弥生".to_string(),
            "https://dluoikwksuixzavqltar.supabase.co/storage/v1/object/public/audio/hayaseyayoi.wav"
                .to_string(),
        );
        map.insert(
            "ちろる".to_string(),
            "https://dluoikwksuixzavqltar.supabase.co/storage/v1/object/public/audio/chirorunia.wav"
                .to_string(),
        );
        // Nombres viejos, por compatibilidad con CSVs anteriores.
        map.insert(
            "Aちゃん".to_string(),
            "https://dluoikwksuixzavqltar.supabase.co/storage/v1/object/public/audio/hayaseyayoi.wav"
                .to_string(),
        );
        map.insert(
            "Bくん".to_string(),
            "https://dluoikwksuixzavqltar.supabase.co/storage/v1/object/public/audio/chirorunia.wav"
                .to_string(),
        );
        AudioCatalog { map }
    }
}

impl AudioCatalog {
    /// Carga el catálogo desde AUDIO_MAP_FILE (oshi_audio.json por defecto).
    /// Si el archivo no existe se usan los valores embebidos.
    pub fn load() -> Result<Self> {
        let path = std::env::var("AUDIO_MAP_FILE").unwrap_or_else(|_| "oshi_audio.json".to_string());
        if !Path::new(&path).exists() {
            log::info!("No existe {}, usando catálogo de audio embebido", path);
            return Ok(AudioCatalog::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("No se pudo leer {}", path))?;
        let map: HashMap<String, String> =
            serde_json::from_str(&raw).with_context(|| format!("JSON inválido en {}", path))?;
        log::info!("Catálogo de audio cargado desde {} ({} entradas)", path, map.len());
        Ok(AudioCatalog { map })
    }

    pub fn from_map(map: HashMap<String, String>) -> Self {
        AudioCatalog { map }
    }

    pub fn url_for(&self, oshi_name: &str) -> Option<&str> {
        self.map.get(oshi_name).map(|s| s.as_str())
    }
}
