// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly except the data
// batcher/dataset glue — keeping framework noise out of the
// domain and application layers.
//
// What's in this layer:
//
//   model.rs     — The encoder backbone and the two classifier
//                  variants behind the TextClassifier trait:
//                  • GapClassifier: dropout + linear head,
//                    loss supplied externally (class-weighted CE)
//                  • IntensityClassifier: integrated head that
//                    computes its own unweighted cross-entropy
//
//   trainer.rs   — The training loop: weighted epoch resampling,
//                  forward, loss, backward, Adam step, running
//                  loss/accuracy per epoch
//
//   evaluator.rs — The evaluation loop: gradient-free single
//                  pass in fixed order, collecting truths,
//                  arg-max predictions and positive-class scores
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Devlin et al. (2019) BERT

/// Encoder backbone and classifier variants
pub mod model;

/// Training loop with class-imbalance correction
pub mod trainer;

/// Deterministic evaluation pass
pub mod evaluator;
