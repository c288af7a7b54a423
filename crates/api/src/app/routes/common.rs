use shopledger_auth::{OperationAuthorization, Permission};

/// Small helper wrapper to associate required permissions with an operation.
pub struct OpAuth<O> {
    pub inner: O,
    pub required: Vec<Permission>,
}

impl<O> OperationAuthorization for OpAuth<O> {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}
