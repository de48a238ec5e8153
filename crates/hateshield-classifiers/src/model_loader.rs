//! Model loading for Candle-based classifiers

use crate::classifier::Classifier;
use crate::labels::LabelSchema;
use crate::model_config::{ModelConfig, ModelSource};
use crate::sequence_classifier::BertSequenceClassifier;
use async_trait::async_trait;
use candle_core::{DType, Device};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hateshield_core::{Error, Result};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

/// Weight files tried in order
const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];

/// Something that can produce a ready-to-use classifier.
///
/// Loading is expensive (download + weight mapping) and is expected to be
/// called once per process.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Load the classifier
    async fn load(&self) -> Result<Arc<dyn Classifier>>;

    /// Identifier of the model this loader produces
    fn model_name(&self) -> String;
}

/// Loads a BERT sequence classifier from the Hugging Face Hub or disk
#[derive(Debug, Clone)]
pub struct CandleModelLoader {
    config: ModelConfig,
}

impl CandleModelLoader {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

#[async_trait]
impl ModelLoader for CandleModelLoader {
    async fn load(&self) -> Result<Arc<dyn Classifier>> {
        let config = self.config.clone();

        // hf-hub's sync API and weight mapping block; keep them off the runtime
        let classifier = tokio::task::spawn_blocking(move || load_bert_classifier(&config))
            .await
            .map_err(|e| Error::internal(format!("Model loading task failed: {}", e)))??;

        Ok(Arc::new(classifier))
    }

    fn model_name(&self) -> String {
        self.config.display_name()
    }
}

fn load_bert_classifier(config: &ModelConfig) -> Result<BertSequenceClassifier> {
    let model_path = resolve_model_path(config)?;
    tracing::info!("Loading BERT classifier from {}", model_path.display());

    let config_json = read_config_json(&model_path)?;
    let bert_config: BertConfig = serde_json::from_value(config_json.clone())
        .map_err(|e| Error::classifier(format!("Failed to parse BERT config: {}", e)))?;

    let labels = LabelSchema::from_config_json(&config_json)?;
    labels.ensure_binary()?;

    let tokenizer = load_tokenizer(&model_path, config.inference.max_length)?;
    let device = get_device(&config.inference.device)?;
    let vb = load_var_builder(&model_path, &device)?;

    let model = load_bert_backbone(&vb, &bert_config, &["bert", ""])?;
    let pooler = load_pooler(&vb, bert_config.hidden_size)?;
    let classifier = candle_nn::linear(bert_config.hidden_size, labels.len(), vb.pp("classifier"))
        .map_err(|e| {
            Error::classifier(format!(
                "Model has no sequence classification head (classifier.*): {}",
                e
            ))
        })?;

    tracing::info!(
        "Successfully loaded BERT classifier with {} labels: {:?}",
        labels.len(),
        labels.as_slice()
    );

    Ok(BertSequenceClassifier {
        name: config.display_name(),
        tokenizer,
        model,
        pooler,
        classifier,
        device,
        labels,
    })
}

/// Resolve the directory holding config, tokenizer, and weights
fn resolve_model_path(config: &ModelConfig) -> Result<PathBuf> {
    match &config.source {
        ModelSource::Local { path } => {
            if !path.exists() {
                return Err(Error::config(format!(
                    "Model path does not exist: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace { repo, revision } => download_from_huggingface(repo, revision),
    }
}

/// Fetch the model files into the hf-hub cache and return their directory
fn download_from_huggingface(repo: &str, revision: &str) -> Result<PathBuf> {
    tracing::info!("Downloading model from HuggingFace: {} @ {}", repo, revision);

    let api = Api::new()
        .map_err(|e| Error::classifier(format!("Failed to initialize HuggingFace API: {}", e)))?;
    let repo_obj = api.repo(Repo::with_revision(
        repo.to_string(),
        RepoType::Model,
        revision.to_string(),
    ));

    let config_path = repo_obj
        .get("config.json")
        .map_err(|e| Error::classifier(format!("Failed to download config.json: {}", e)))?;

    let weights = WEIGHT_FILES
        .iter()
        .find(|file| match repo_obj.get(file) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Weight file {} unavailable: {}", file, e);
                false
            }
        });
    if weights.is_none() {
        return Err(Error::classifier(format!(
            "No model weights found in {} (tried {})",
            repo,
            WEIGHT_FILES.join(", ")
        )));
    }

    let mut found_tokenizer = false;
    for file in ["tokenizer.json", "vocab.txt", "tokenizer_config.json"] {
        match repo_obj.get(file) {
            Ok(_) => {
                tracing::debug!("Found tokenizer file: {}", file);
                found_tokenizer |= file != "tokenizer_config.json";
            }
            Err(_) => tracing::debug!("File not found: {}", file),
        }
    }
    if !found_tokenizer {
        return Err(Error::classifier(
            "No tokenizer found (tried tokenizer.json, vocab.txt)",
        ));
    }

    let model_dir = config_path
        .parent()
        .ok_or_else(|| Error::classifier("Invalid cache path"))?;

    tracing::info!("Model available at: {}", model_dir.display());
    Ok(model_dir.to_path_buf())
}

fn read_config_json(model_path: &Path) -> Result<serde_json::Value> {
    let config_path = model_path.join("config.json");
    let raw = std::fs::read_to_string(&config_path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("{}: {}", config_path.display(), e))
    })?;
    Ok(serde_json::from_str(&raw)?)
}

fn get_device(device: &str) -> Result<Device> {
    match device {
        "cuda" => Device::new_cuda(0)
            .map_err(|e| Error::classifier(format!("Failed to initialize CUDA: {}", e))),
        "metal" | "mps" => Device::new_metal(0)
            .map_err(|e| Error::classifier(format!("Failed to initialize Metal: {}", e))),
        "cpu" => Ok(Device::Cpu),
        other => Err(Error::config(format!("Unknown inference device '{}'", other))),
    }
}

fn load_var_builder(model_path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_path.join(WEIGHT_FILES[0]);
    if safetensors.exists() {
        // SAFETY: the cached weight file is not modified while mapped
        return unsafe {
            VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)
        }
        .map_err(|e| Error::classifier(format!("Failed to load weights: {}", e)));
    }

    let pytorch = model_path.join(WEIGHT_FILES[1]);
    if pytorch.exists() {
        return VarBuilder::from_pth(&pytorch, DType::F32, device)
            .map_err(|e| Error::classifier(format!("Failed to load PyTorch weights: {}", e)));
    }

    Err(Error::classifier(format!(
        "No model weights found in {}",
        model_path.display()
    )))
}

fn load_bert_backbone(
    vb: &VarBuilder,
    config: &BertConfig,
    prefixes: &[&str],
) -> Result<BertModel> {
    let mut errors = Vec::new();

    for prefix in prefixes {
        let vb_prefix = if prefix.is_empty() {
            vb.clone()
        } else {
            vb.pp(*prefix)
        };
        let effective_prefix = if prefix.is_empty() { "<root>" } else { prefix };

        match BertModel::load(vb_prefix, config) {
            Ok(model) => {
                tracing::info!("Loaded BERT backbone from '{}'", effective_prefix);
                return Ok(model);
            }
            Err(e) => errors.push(format!("{}: {}", effective_prefix, e)),
        }
    }

    Err(Error::classifier(format!(
        "Failed to load BERT backbone with tried prefixes [{}]",
        errors.join(" | ")
    )))
}

fn load_pooler(vb: &VarBuilder, hidden_size: usize) -> Result<Linear> {
    for prefix in ["bert.pooler.dense", "pooler.dense"] {
        if let Ok(linear) = candle_nn::linear(hidden_size, hidden_size, vb.pp(prefix)) {
            tracing::debug!("Loaded pooler from '{}'", prefix);
            return Ok(linear);
        }
    }

    Err(Error::classifier(
        "Model has no pooler weights (bert.pooler.dense.*)",
    ))
}

/// Load `tokenizer.json`, or build a WordPiece tokenizer from `vocab.txt`,
/// then fix truncation to `max_length` tokens.
fn load_tokenizer(model_path: &Path, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = base_tokenizer(model_path)?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| Error::classifier(format!("Failed to configure truncation: {}", e)))?;
    tokenizer.with_padding(Some(PaddingParams::default()));

    Ok(tokenizer)
}

fn base_tokenizer(model_path: &Path) -> Result<Tokenizer> {
    let tokenizer_json_path = model_path.join("tokenizer.json");
    if tokenizer_json_path.exists() {
        tracing::debug!("Loading tokenizer from tokenizer.json");
        return Tokenizer::from_file(&tokenizer_json_path)
            .map_err(|e| Error::classifier(format!("Failed to load tokenizer.json: {}", e)));
    }

    let vocab_path = model_path.join("vocab.txt");
    if vocab_path.exists() {
        tracing::debug!("Building tokenizer from vocab.txt");

        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
        use tokenizers::processors::bert::BertProcessing;

        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(|e| Error::classifier(format!("Failed to build WordPiece model: {}", e)))?;

        let lowercase = lowercase_setting(model_path);
        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::new(true, true, None, lowercase)));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));

        let special = |token: &str| {
            tokenizer
                .token_to_id(token)
                .map(|id| (token.to_string(), id))
                .ok_or_else(|| Error::classifier(format!("Vocabulary is missing {}", token)))
        };
        let sep = special("[SEP]")?;
        let cls = special("[CLS]")?;
        tokenizer.with_post_processor(Some(BertProcessing::new(sep, cls)));

        return Ok(tokenizer);
    }

    Err(Error::classifier(format!(
        "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
        model_path.display()
    )))
}

/// `do_lower_case` from `tokenizer_config.json`, defaulting to BERT's `true`
fn lowercase_setting(model_path: &Path) -> bool {
    std::fs::read_to_string(model_path.join("tokenizer_config.json"))
        .ok()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
        .and_then(|config| config.get("do_lower_case").and_then(|v| v.as_bool()))
        .unwrap_or(true)
}
