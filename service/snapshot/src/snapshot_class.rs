use std::sync::Arc;

use async_trait::async_trait;
use domain_snapshot::{
    exception::{SnapshotException, SnapshotResult},
    model::{
        entity::{Backup, Object, PersistentVolumeClaim, SnapshotClass},
        vo::{keys, Resolution},
    },
    repository::SnapshotClassRepo,
    service::SnapshotClassResolverService,
};
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct SnapshotClassResolverServiceImpl {
    class_repo: Arc<dyn SnapshotClassRepo>,
}

/// Resolution tiers, evaluated in declaration order.
#[derive(Debug, Clone, Copy)]
enum Tier {
    ClaimAnnotation,
    BackupAnnotation,
    DefaultLabel,
}

impl Tier {
    const ORDER: [Tier; 3] = [Tier::ClaimAnnotation, Tier::BackupAnnotation, Tier::DefaultLabel];
}

struct ResolveRequest<'a> {
    driver: &'a str,
    backup: &'a Backup,
    claim: &'a PersistentVolumeClaim,
}

type TierResolution = Resolution<SnapshotClass, SnapshotException>;

impl SnapshotClassResolverServiceImpl {
    async fn evaluate(&self, tier: Tier, req: &ResolveRequest<'_>) -> TierResolution {
        match tier {
            Tier::ClaimAnnotation => {
                let Some(name) = req
                    .claim
                    .metadata
                    .annotation(keys::VOLUME_SNAPSHOT_CLASS_SELECTOR_LABEL)
                else {
                    return Resolution::FallThrough;
                };
                match self.annotated_class(tier, name).await {
                    Resolution::Use(class) if class.driver != req.driver => {
                        debug!(
                            "Claim {} prefers snapshot class {name} of driver {}, not {}; ignoring it",
                            req.claim.metadata.key(),
                            class.driver,
                            req.driver
                        );
                        Resolution::FallThrough
                    }
                    other => other,
                }
            }
            // Backup annotations are keyed by driver already, so the class driver is not rechecked.
            Tier::BackupAnnotation => match req.backup.class_for_driver(req.driver) {
                Some(name) => self.annotated_class(tier, name).await,
                None => Resolution::FallThrough,
            },
            Tier::DefaultLabel => match self.class_repo.get_all().await {
                Ok(classes) => match select_default(req.driver, &classes) {
                    Ok(class) => Resolution::Use(class.clone()),
                    Err(e) => Resolution::Fail(e),
                },
                Err(e) => Resolution::Fail(e.into()),
            },
        }
    }

    /// Fetch a class named by an annotation. A missing class falls through.
    async fn annotated_class(&self, tier: Tier, name: &str) -> TierResolution {
        match self.class_repo.get_by_name(name).await {
            Ok(Some(class)) => Resolution::Use(class),
            Ok(None) => {
                warn!("Snapshot class {name} named by {tier:?} does not exist; falling through");
                Resolution::FallThrough
            }
            Err(e) => Resolution::Fail(e.into()),
        }
    }
}

#[async_trait]
impl SnapshotClassResolverService for SnapshotClassResolverServiceImpl {
    #[tracing::instrument(skip_all, fields(driver = %driver, backup = backup.name(), claim = claim.name()))]
    async fn resolve(
        &self,
        driver: &str,
        backup: &Backup,
        claim: &PersistentVolumeClaim,
    ) -> SnapshotResult<SnapshotClass> {
        let req = ResolveRequest {
            driver,
            backup,
            claim,
        };
        for tier in Tier::ORDER {
            match self.evaluate(tier, &req).await {
                Resolution::Use(class) => {
                    debug!("Resolved snapshot class {} by {tier:?}", class.name());
                    return Ok(class);
                }
                Resolution::FallThrough => continue,
                Resolution::Fail(e) => return Err(e),
            }
        }
        // The default tier never falls through.
        Err(SnapshotException::not_found(SnapshotClass::KIND, format!("for driver {driver}")))
    }
}

/// Exactly one class of `driver` carrying the default selector label.
fn select_default<'a>(driver: &str, classes: &'a [SnapshotClass]) -> SnapshotResult<&'a SnapshotClass> {
    let labeled: Vec<&SnapshotClass> = classes
        .iter()
        .filter(|c| c.driver == driver)
        .filter(|c| c.is_default_selected())
        .collect();
    single(driver, labeled)
}

/// Class to use when there is no backup or claim to consult.
///
/// A lone class of `driver` is used even without the default selector label;
/// with several, the label has to single one out.
pub fn resolve_for_storage_class(
    driver: &str,
    classes: &[SnapshotClass],
) -> SnapshotResult<SnapshotClass> {
    let candidates: Vec<&SnapshotClass> = classes.iter().filter(|c| c.driver == driver).collect();
    let chosen = match candidates.len() {
        0 | 1 => single(driver, candidates)?,
        _ => {
            let labeled: Vec<&SnapshotClass> = candidates
                .iter()
                .copied()
                .filter(|c| c.is_default_selected())
                .collect();
            if labeled.is_empty() {
                return Err(ambiguous(driver, &candidates));
            }
            single(driver, labeled)?
        }
    };
    Ok(chosen.clone())
}

fn single<'a>(driver: &str, candidates: Vec<&'a SnapshotClass>) -> SnapshotResult<&'a SnapshotClass> {
    match candidates.as_slice() {
        [] => Err(SnapshotException::not_found(
            SnapshotClass::KIND,
            format!("for driver {driver}"),
        )),
        [only] => Ok(*only),
        many => Err(ambiguous(driver, many)),
    }
}

fn ambiguous(driver: &str, candidates: &[&SnapshotClass]) -> SnapshotException {
    SnapshotException::AmbiguousSelection {
        driver: driver.to_string(),
        candidates: candidates.iter().map(|c| c.name().to_string()).collect(),
    }
}
