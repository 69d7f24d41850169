use crate::{
    assets::decode::{self, DecodeLimits, RasterImage},
    assets::stickers::StickerCatalog,
    config::CompositorConfig,
    encode::png::encode_png,
    foundation::core::Placement,
    foundation::error::{CamagruError, CamagruResult},
    render::composite::composite_overlay,
    storage::store::{ImageStore, StoredImage},
};

/// One overlay to draw: a sticker id, a data-URI, or a file path, plus its placement.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayLayer {
    /// Overlay reference, resolved against the sticker catalog first.
    pub overlay: String,
    /// Position and scale; defaults to centered at native size.
    #[serde(default)]
    pub placement: Placement,
}

impl OverlayLayer {
    /// Layer with an explicit placement.
    pub fn new(overlay: impl Into<String>, placement: Placement) -> Self {
        Self {
            overlay: overlay.into(),
            placement,
        }
    }
}

/// Stateless sticker compositor: decode, overlay, encode PNG, persist.
///
/// Holds only configuration, so a single instance can serve concurrent requests by
/// reference. Nothing decoded is kept between calls.
#[derive(Clone, Debug)]
pub struct Compositor {
    stickers: StickerCatalog,
    store: ImageStore,
    limits: DecodeLimits,
    max_layers: usize,
}

impl Compositor {
    /// Build from a validated config.
    pub fn new(config: &CompositorConfig) -> CamagruResult<Self> {
        config.validate()?;
        Ok(Self {
            stickers: StickerCatalog::new(
                &config.sticker_dir,
                config.sticker_url_prefix.as_str(),
            ),
            store: ImageStore::new(&config.upload_dir, config.public_prefix.as_str()),
            limits: config.decode_limits(),
            max_layers: config.max_layers,
        })
    }

    /// Sticker catalog used to resolve overlay identifiers.
    pub fn stickers(&self) -> &StickerCatalog {
        &self.stickers
    }

    /// Output store.
    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Composite at most one overlay onto `primary` and store the result for `user_id`.
    ///
    /// An overlay that cannot be resolved or decoded is dropped and the primary image is
    /// stored unchanged.
    #[tracing::instrument(
        skip(self, primary, overlay, placement),
        fields(has_overlay = overlay.is_some())
    )]
    pub fn composite(
        &self,
        user_id: &str,
        primary: &str,
        overlay: Option<&str>,
        placement: Option<Placement>,
    ) -> CamagruResult<StoredImage> {
        let layers: Vec<(&str, Placement)> = overlay
            .map(|o| (o, placement.unwrap_or_default()))
            .into_iter()
            .collect();
        self.store_layers(user_id, primary, &layers)
    }

    /// Composite several overlays in order. Layers that fail to load are skipped.
    #[tracing::instrument(skip(self, primary, layers), fields(layers = layers.len()))]
    pub fn composite_layers(
        &self,
        user_id: &str,
        primary: &str,
        layers: &[OverlayLayer],
    ) -> CamagruResult<StoredImage> {
        let layers: Vec<(&str, Placement)> = layers
            .iter()
            .map(|l| (l.overlay.as_str(), l.placement))
            .collect();
        self.store_layers(user_id, primary, &layers)
    }

    /// Decode and flatten without encoding or storing.
    pub fn render(&self, primary: &str, layers: &[OverlayLayer]) -> CamagruResult<RasterImage> {
        let layers: Vec<(&str, Placement)> = layers
            .iter()
            .map(|l| (l.overlay.as_str(), l.placement))
            .collect();
        self.render_layers(primary, &layers)
    }

    fn store_layers(
        &self,
        user_id: &str,
        primary: &str,
        layers: &[(&str, Placement)],
    ) -> CamagruResult<StoredImage> {
        let canvas = self.render_layers(primary, layers)?;
        let dimensions = canvas.dimensions();
        let png = encode_png(canvas)?;
        tracing::debug!(bytes = png.len(), "encoded png");
        self.store.persist(user_id, &png, dimensions)
    }

    fn render_layers(
        &self,
        primary: &str,
        layers: &[(&str, Placement)],
    ) -> CamagruResult<RasterImage> {
        if layers.len() > self.max_layers {
            return Err(CamagruError::validation(format!(
                "{} overlays requested (limit {})",
                layers.len(),
                self.max_layers
            )));
        }

        let mut canvas = decode::load_source(primary, &self.limits).map_err(|e| match e {
            CamagruError::Decode(_) => e,
            other => CamagruError::decode(other.to_string()),
        })?;
        tracing::debug!(
            width = canvas.width(),
            height = canvas.height(),
            "decoded primary image"
        );

        for (index, (reference, placement)) in layers.iter().enumerate() {
            let overlay = match self.load_overlay(reference) {
                Ok(img) => img,
                Err(err) => {
                    tracing::warn!(index, error = %err, "overlay unavailable; skipping");
                    continue;
                }
            };
            match composite_overlay(&mut canvas, overlay, placement, self.limits.max_pixels) {
                Ok(covered) => tracing::debug!(index, covered, "overlay composited"),
                Err(err) => {
                    tracing::warn!(index, error = %err, "overlay placement rejected; skipping")
                }
            }
        }

        Ok(canvas)
    }

    fn load_overlay(&self, reference: &str) -> CamagruResult<RasterImage> {
        match self.stickers.resolve(reference) {
            Some(path) => decode::load_image_file(&path, &self.limits),
            None => decode::load_source(reference, &self.limits),
        }
    }
}
