// GraphQL documents sent to the Monarch API. Each selection set carries the
// fields `models` deserializes; keep the two in sync.

pub const GET_TRANSACTION_OP: &str = "GetTransactionDrawer";
pub const GET_TRANSACTION: &str = r#"query GetTransactionDrawer($id: UUID!, $redirectPosted: Boolean) {
  getTransaction(id: $id, redirectPosted: $redirectPosted) {
    id
    amount
    pending
    isRecurring
    date
    originalDate
    hideFromReports
    needsReview
    reviewedAt
    plaidName
    notes
    isSplitTransaction
    isManual
    account {
      id
      displayName
      __typename
    }
    category {
      id
      name
      icon
      group {
        id
        type
        __typename
      }
      __typename
    }
    merchant {
      id
      name
      transactionCount
      __typename
    }
    tags {
      id
      name
      color
      order
      __typename
    }
    __typename
  }
}"#;

pub const SEARCH_TRANSACTIONS_OP: &str = "Web_GetTransactionsList";
pub const SEARCH_TRANSACTIONS: &str = r#"query Web_GetTransactionsList($offset: Int, $limit: Int, $filters: TransactionFilterInput, $orderBy: TransactionOrdering) {
  allTransactions(filters: $filters) {
    totalCount
    results(offset: $offset, limit: $limit, orderBy: $orderBy) {
      id
      ...TransactionOverviewFields
      __typename
    }
    __typename
  }
}

fragment TransactionOverviewFields on Transaction {
  id
  amount
  pending
  date
  originalDate
  hideFromReports
  plaidName
  notes
  isRecurring
  reviewStatus
  needsReview
  dataProviderDescription
  account {
    displayName
    id
  }
  isSplitTransaction
  category {
    id
    name
    icon
    group {
      id
      type
      __typename
    }
    __typename
  }
  merchant {
    name
    id
    transactionsCount
    __typename
  }
  tags {
    id
    name
    color
    order
    __typename
  }
  __typename
}"#;

pub const GET_CATEGORIES_OP: &str = "GetCategories";
pub const GET_CATEGORIES: &str = r#"query GetCategories {
  categories {
    id
    order
    name
    icon
    systemCategory
    isSystemCategory
    isDisabled
    group {
      id
      name
      type
      __typename
    }
    __typename
  }
}"#;

pub const GET_TAGS_OP: &str = "GetHouseholdTransactionTags";
pub const GET_TAGS: &str = r#"query GetHouseholdTransactionTags($search: String, $limit: Int, $includeTransactionCount: Boolean = false) {
  householdTransactionTags(search: $search, limit: $limit) {
    id
    name
    color
    order
    transactionCount @include(if: $includeTransactionCount)
    __typename
  }
}"#;

pub const UPDATE_TRANSACTION_OP: &str = "Web_TransactionDrawerUpdateTransaction";
pub const UPDATE_TRANSACTION: &str = r#"mutation Web_TransactionDrawerUpdateTransaction($input: UpdateTransactionMutationInput!) {
  updateTransaction(input: $input) {
    transaction {
      id
      amount
      pending
      date
      originalDate
      hideFromReports
      plaidName
      notes
      isRecurring
      reviewStatus
      needsReview
      dataProviderDescription
      account {
        displayName
        id
      }
      isSplitTransaction
      category {
        id
        name
        icon
        group {
          id
          type
          __typename
        }
        __typename
      }
      merchant {
        name
        id
        transactionsCount
        __typename
      }
      tags {
        id
        name
        color
        order
        __typename
      }
      __typename
    }
    errors {
      ...PayloadErrorFields
      __typename
    }
    __typename
  }
}

fragment PayloadErrorFields on PayloadError {
  fieldErrors {
    field
    messages
    __typename
  }
  message
  code
  __typename
}"#;

pub const SET_TRANSACTION_TAGS_OP: &str = "Web_SetTransactionTags";
pub const SET_TRANSACTION_TAGS: &str = r#"mutation Web_SetTransactionTags($input: SetTransactionTagsInput!) {
  setTransactionTags(input: $input) {
    errors {
      ...PayloadErrorFields
      __typename
    }
    transaction {
      id
      tags {
        id
        __typename
      }
      __typename
    }
    __typename
  }
}

fragment PayloadErrorFields on PayloadError {
  fieldErrors {
    field
    messages
    __typename
  }
  message
  code
  __typename
}"#;

pub const BULK_UPDATE_TRANSACTIONS_OP: &str = "Common_BulkUpdateTransactionsMutation";
pub const BULK_UPDATE_TRANSACTIONS: &str = r#"mutation Common_BulkUpdateTransactionsMutation($selectedTransactionIds: [ID!], $excludedTransactionIds: [ID!], $allSelected: Boolean!, $expectedAffectedTransactionCount: Int!, $updates: TransactionUpdateParams!, $filters: TransactionFilterInput) {
  bulkUpdateTransactions(
    selectedTransactionIds: $selectedTransactionIds
    excludedTransactionIds: $excludedTransactionIds
    updates: $updates
    allSelected: $allSelected
    expectedAffectedTransactionCount: $expectedAffectedTransactionCount
    filters: $filters
  ) {
    success
    affectedCount
    errors {
      message
      __typename
    }
    __typename
  }
}"#;

pub const FIND_MERCHANTS_OP: &str = "Web_GetMerchantSelectHouseholdMerchants";
pub const FIND_MERCHANTS: &str = r#"query Web_GetMerchantSelectHouseholdMerchants($offset: Int!, $limit: Int!, $orderBy: MerchantOrdering, $search: String) {
  merchants(
    offset: $offset
    limit: $limit
    orderBy: $orderBy
    search: $search
    includeMerchantsWithoutTransactions: false
  ) {
    id
    name
    logoUrl
    transactionCount
    __typename
  }
}"#;
