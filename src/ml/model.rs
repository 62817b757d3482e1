use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// ─── TextClassifier ───────────────────────────────────────────────────────────
/// The seam between the training/evaluation loops and the two model
/// variants. Both variants produce per-class logits; they differ in
/// where the training criterion lives:
///   - the gap model has no built-in loss — the training loop applies
///     class-weighted cross-entropy externally
///   - the intensity model computes its own (unweighted) cross-entropy
pub trait TextClassifier<B: Backend> {
    fn num_labels(&self) -> usize;

    /// input_ids, attention_mask: [batch, seq_len] → logits: [batch, num_labels]
    fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2>;

    /// Some(loss) when the model owns its criterion, None otherwise.
    fn builtin_loss(
        &self,
        logits:  Tensor<B, 2>,
        targets: Tensor<B, 1, Int>,
    ) -> Option<Tensor<B, 1>>;
}

// ─── Encoder Backbone ─────────────────────────────────────────────────────────
// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct EncoderBackboneConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
}

impl EncoderBackboneConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EncoderBackbone<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        EncoderBackbone { token_embedding, position_embedding, layers, final_norm, dropout }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// pad_mask: [batch, seq_len], true at padded positions —
    /// keeps padding out of the attention scores.
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_output = self
            .self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_pad(pad_mask))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

/// The pretrained(-shape) encoder: embeddings, masked self-attention
/// blocks, and masked mean pooling down to one vector per sentence.
/// Fully fine-tuned during training — nothing is frozen.
#[derive(Module, Debug)]
pub struct EncoderBackbone<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub dropout:            Dropout,
}

impl<B: Backend> EncoderBackbone<B> {
    /// input_ids, attention_mask: [batch, seq_len] → pooled: [batch, d_model]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let [batch_size, seq_len] = input_ids.dims();

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let pad_mask = attention_mask.clone().equal_elem(0);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, pad_mask.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]

        // Mean-pool over real tokens only; padding contributes nothing.
        let mask_f = attention_mask.float().unsqueeze_dim::<3>(2); // [batch, seq_len, 1]
        let summed = (x * mask_f.clone()).sum_dim(1);              // [batch, 1, d_model]
        let counts = mask_f.sum_dim(1).clamp_min(1.0);             // [batch, 1, 1]
        let [b, _, d] = summed.dims();
        (summed / counts).reshape([b, d])
    }
}

// ─── Variant A: Gap Classifier (custom head) ──────────────────────────────────
#[derive(Config, Debug)]
pub struct GapClassifierConfig {
    pub backbone: EncoderBackboneConfig,
    pub dropout:  f64,
}

impl GapClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> GapClassifier<B> {
        self.init_from(self.backbone.init(device), device)
    }

    /// Build around an already-initialised (e.g. pretrained) backbone.
    pub fn init_from<B: Backend>(
        &self,
        backbone: EncoderBackbone<B>,
        device:   &B::Device,
    ) -> GapClassifier<B> {
        GapClassifier {
            backbone,
            dropout: DropoutConfig::new(self.dropout).init(),
            head:    LinearConfig::new(self.backbone.d_model, 2).init(device),
        }
    }
}

/// Binary anger-gap detector: backbone + dropout-regularised linear
/// projection to 2 logits. The training loop supplies the
/// class-weighted criterion.
#[derive(Module, Debug)]
pub struct GapClassifier<B: Backend> {
    pub backbone: EncoderBackbone<B>,
    pub dropout:  Dropout,
    pub head:     Linear<B>,
}

impl<B: Backend> TextClassifier<B> for GapClassifier<B> {
    fn num_labels(&self) -> usize {
        2
    }

    fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let pooled = self.backbone.forward(input_ids, attention_mask);
        self.head.forward(self.dropout.forward(pooled))
    }

    fn builtin_loss(
        &self,
        _logits:  Tensor<B, 2>,
        _targets: Tensor<B, 1, Int>,
    ) -> Option<Tensor<B, 1>> {
        None
    }
}

// ─── Variant B: Intensity Classifier (integrated head) ────────────────────────
#[derive(Config, Debug)]
pub struct IntensityClassifierConfig {
    pub backbone:   EncoderBackboneConfig,
    pub dropout:    f64,
    #[config(default = 4)]
    pub num_labels: usize,
}

impl IntensityClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> IntensityClassifier<B> {
        self.init_from(self.backbone.init(device), device)
    }

    pub fn init_from<B: Backend>(
        &self,
        backbone: EncoderBackbone<B>,
        device:   &B::Device,
    ) -> IntensityClassifier<B> {
        IntensityClassifier {
            backbone,
            dropout:    DropoutConfig::new(self.dropout).init(),
            head:       LinearConfig::new(self.backbone.d_model, self.num_labels).init(device),
            num_labels: self.num_labels,
        }
    }
}

/// Four-level intensity classifier in the style of an off-the-shelf
/// sequence-classification model: accepts labels and computes its own
/// unweighted cross-entropy alongside the logits.
#[derive(Module, Debug)]
pub struct IntensityClassifier<B: Backend> {
    pub backbone:   EncoderBackbone<B>,
    pub dropout:    Dropout,
    pub head:       Linear<B>,
    pub num_labels: usize,
}

impl<B: Backend> TextClassifier<B> for IntensityClassifier<B> {
    fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let pooled = self.backbone.forward(input_ids, attention_mask);
        self.head.forward(self.dropout.forward(pooled))
    }

    fn builtin_loss(
        &self,
        logits:  Tensor<B, 2>,
        targets: Tensor<B, 1, Int>,
    ) -> Option<Tensor<B, 1>> {
        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        Some(ce.forward(logits, targets))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn small_backbone() -> EncoderBackboneConfig {
        EncoderBackboneConfig::new(16, 8, 32, 2, 1, 64, 0.0)
    }

    #[test]
    fn test_logit_shapes_per_variant() {
        let device = Default::default();
        let gap: GapClassifier<TestBackend> =
            GapClassifierConfig::new(small_backbone(), 0.0).init(&device);
        let intensity: IntensityClassifier<TestBackend> =
            IntensityClassifierConfig::new(small_backbone(), 0.0).init(&device);

        let ids  = Tensor::<TestBackend, 1, Int>::from_ints([2, 3, 4, 2, 3, 0], &device)
            .reshape([2, 3]);
        let mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 1, 1, 1, 0], &device)
            .reshape([2, 3]);

        assert_eq!(gap.forward(ids.clone(), mask.clone()).dims(), [2, 2]);
        assert_eq!(intensity.forward(ids, mask).dims(), [2, 4]);
    }

    #[test]
    fn test_only_intensity_has_builtin_loss() {
        let device = Default::default();
        let gap: GapClassifier<TestBackend> =
            GapClassifierConfig::new(small_backbone(), 0.0).init(&device);
        let intensity: IntensityClassifier<TestBackend> =
            IntensityClassifierConfig::new(small_backbone(), 0.0).init(&device);

        let logits2 = Tensor::<TestBackend, 1>::from_floats([0.2, 0.8, 0.6, 0.4], &device)
            .reshape([2, 2]);
        let logits4 = Tensor::<TestBackend, 1>::from_floats(
            [0.2, 0.8, 0.6, 0.4, 0.1, 0.3, 0.5, 0.7],
            &device,
        )
        .reshape([2, 4]);
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 1], &device);

        assert!(gap.builtin_loss(logits2, targets.clone()).is_none());
        let loss = intensity.builtin_loss(logits4, targets).unwrap();
        assert!(loss.into_scalar().elem::<f64>() > 0.0);
    }

    #[test]
    fn test_padding_does_not_change_pooled_output() {
        // Mean pooling over the mask: trailing padding must be inert.
        let device = Default::default();
        let backbone: EncoderBackbone<TestBackend> = small_backbone().init(&device);

        let short_ids  = Tensor::<TestBackend, 1, Int>::from_ints([2, 3], &device).reshape([1, 2]);
        let short_mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1], &device).reshape([1, 2]);
        let padded_ids  = Tensor::<TestBackend, 1, Int>::from_ints([2, 3, 0, 0], &device).reshape([1, 4]);
        let padded_mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 0, 0], &device).reshape([1, 4]);

        let a = backbone.forward(short_ids, short_mask).into_data().convert::<f32>();
        let b = backbone.forward(padded_ids, padded_mask).into_data().convert::<f32>();
        let a = a.to_vec::<f32>().unwrap();
        let b = b.to_vec::<f32>().unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-4, "pooled outputs diverged: {x} vs {y}");
        }
    }
}
