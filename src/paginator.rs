use {
    crate::{ListRolesInput, ListRolesOutput, Role, VeilError},
    async_trait::async_trait,
    log::trace,
    std::error::Error,
    tokio_util::sync::CancellationToken,
};

/// Errors returned by the IAM client; only their message is kept.
pub type PageError = Box<dyn Error + Send + Sync>;

/// A client able to issue a single IAM `ListRoles` request.
#[async_trait]
pub trait ListRolesApi: Send + Sync {
    async fn list_roles(&self, input: ListRolesInput) -> Result<ListRolesOutput, PageError>;
}

/// A source of roles that is read one page at a time.
#[async_trait]
pub trait RolePager: Send {
    /// Whether `next_page` should be called again.
    fn has_more_pages(&self) -> bool;

    /// Fetch the next page of roles.
    async fn next_page(&mut self) -> Result<Vec<Role>, PageError>;
}

/// Walks `ListRoles` results by following the `Marker` of each truncated response.
pub struct RolePaginator<'a, C: ?Sized> {
    client: &'a C,
    input: ListRolesInput,
    first_page: bool,
    next_marker: Option<String>,
}

impl<'a, C: ListRolesApi + ?Sized> RolePaginator<'a, C> {
    pub fn new(client: &'a C, input: ListRolesInput) -> Self {
        Self {
            client,
            input,
            first_page: true,
            next_marker: None,
        }
    }
}

#[async_trait]
impl<'a, C: ListRolesApi + ?Sized> RolePager for RolePaginator<'a, C> {
    fn has_more_pages(&self) -> bool {
        self.first_page || self.next_marker.is_some()
    }

    async fn next_page(&mut self) -> Result<Vec<Role>, PageError> {
        let requested = self.next_marker.take();
        let input = self.input.clone().with_marker(requested.clone());
        let result = self.client.list_roles(input).await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                self.next_marker = requested;
                return Err(e);
            }
        };

        self.first_page = false;
        let (roles, is_truncated, marker) = output.into_parts();
        self.next_marker = match marker {
            Some(marker) if is_truncated && Some(&marker) != requested.as_ref() => Some(marker),
            Some(marker) if is_truncated => {
                trace!("ListRoles returned the marker it was called with; stopping: marker={}", marker);
                None
            }
            _ => None,
        };

        trace!("ListRoles page: roles={} next_marker={:?}", roles.len(), self.next_marker);
        Ok(roles)
    }
}

/// Retrieve every role from the pager, one page after another.
///
/// A failed page aborts the enumeration and discards the pages already retrieved. Cancelling `cancel` interrupts an
/// in-flight page request.
pub async fn enumerate_roles<P: RolePager + ?Sized>(
    pager: &mut P,
    cancel: &CancellationToken,
) -> Result<Vec<Role>, VeilError> {
    let mut roles = Vec::new();

    while pager.has_more_pages() {
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(VeilError::Cancelled),
            page = pager.next_page() => page,
        };

        match page {
            Ok(page) => roles.extend(page),
            Err(e) => return Err(VeilError::Enumeration(e.to_string())),
        }
    }

    Ok(roles)
}
