use futures_util::future::join_all;
use podmail_rdf::Iri;
use podmail_remote::{Fetch, FetchError, Request};
use tracing::{debug, warn};

use crate::{AccessError, PermissionSet, WAC_ALLOW, parse_capability_header};

/// Reads the capabilities advertised for `uri` with a `HEAD` request
pub async fn probe<F>(fetcher: &F, uri: &Iri) -> Result<PermissionSet, AccessError>
where
    F: Fetch + ?Sized,
{
    let response = fetcher.fetch(Request::head(uri.clone())).await?;
    if !response.is_success() {
        return Err(FetchError::Status {
            uri: uri.clone(),
            status: response.status,
        }
        .into());
    }

    let header = response
        .header(WAC_ALLOW)
        .ok_or_else(|| AccessError::MissingHeader { uri: uri.clone() })?;
    Ok(parse_capability_header(header)?)
}

/// Returns the candidates the fetcher's identity may write or append to.
///
/// Candidates are probed concurrently. A candidate whose probe fails is left
/// out; the order of the remaining candidates is preserved.
pub async fn find_writable<F>(fetcher: &F, candidates: &[Iri]) -> Vec<Iri>
where
    F: Fetch + ?Sized,
{
    let probes = join_all(candidates.iter().map(|uri| probe(fetcher, uri))).await;

    candidates
        .iter()
        .zip(probes)
        .filter_map(|(uri, probe)| match probe {
            Ok(permissions) if permissions.user_can_write() => Some(uri.clone()),
            Ok(_) => {
                debug!(uri = %uri, "Resource is not writable");
                None
            }
            Err(error) => {
                warn!(uri = %uri, "Could not probe resource: {error}");
                None
            }
        })
        .collect()
}
